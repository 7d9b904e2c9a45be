use crate::CLAP_STYLING;
use clap::{arg, command};
use std::path::PathBuf;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("siteaudit")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("siteaudit")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-v --"verbose" ... "Increase log verbosity (-v debug, -vv trace)")
                .required(false)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("audit")
                .about("Audit the link graph and SEO metadata of a built static site")
                .arg(
                    arg!([ROOT])
                        .required(false)
                        .help("Site root directory containing index.html")
                        .default_value("."),
                )
                .arg(
                    arg!(-c --"config" <PATH>)
                        .required(false)
                        .help("JSON configuration file (default: siteaudit.json in ROOT if present)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--"domain" <DOMAIN>)
                        .required(false)
                        .help("The site's own domain; absolute links to it are not external"),
                )
                .arg(
                    arg!(--"content-dir" <DIR>)
                        .required(false)
                        .help("Content directory scanned next to the root and checked for CTA policy"),
                )
                .arg(
                    arg!(--"depth-threshold" <N>)
                        .required(false)
                        .help("Pages deeper than this many clicks from home are reported")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(-t --"workers" <NUM_WORKERS>)
                        .required(false)
                        .help("Number of concurrent file readers")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, markdown")
                        .value_parser(["text", "json", "markdown", "md"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: print to screen)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--"fail-under" <SCORE>)
                        .required(false)
                        .help("Exit with status 2 when the score is below this value")
                        .value_parser(clap::value_parser!(u32).range(0..=100)),
                ),
        )
        .subcommand(
            command!("init")
                .about("Writes the default siteaudit.json configuration")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Directory or file path for the configuration")
                        .default_value("."),
                )
                .arg(
                    arg!(-f - -"force")
                        .help("Overwrite an existing configuration file")
                        .required(false),
                ),
        )
}
