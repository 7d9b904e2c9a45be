// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

pub use handlers::{
    AuditOutcome, ConfigOverrides, audit_site, expand_path, init_target, load_config,
    write_default_config,
};
