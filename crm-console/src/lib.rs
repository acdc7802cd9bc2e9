//! CRM console session
//!
//! Wires the customization core together for one running console: the
//! configuration store (file-backed or in memory), the widget registry and
//! renderer, the custom field manager, the REST client, the notice queue and
//! the sidebar/route model.
//!
//! ```rust,ignore
//! let settings = ConsoleSettings::load()?;
//! logging::init(&settings.log_filter);
//! let session = ConsoleSession::start(settings).await?;
//! let page = session.render_page("dashboard").await;
//! session.shutdown();
//! ```

pub mod error;
pub mod field_manager;
pub mod logging;
pub mod navigation;
pub mod notify;
pub mod session;

pub use crm_config::ConsoleSettings;
pub use error::{ConsoleError, Result};
pub use field_manager::{Editor, FieldManager, DELETE_WARNING};
pub use navigation::{match_route, NavItem, RouteMatch, Sidebar};
pub use notify::{Notice, NoticeLevel, Notices};
pub use session::ConsoleSession;
