mod app_id;
pub use app_id::*;
mod app_record;
pub use app_record::*;
mod category;
pub use category::*;
mod settings;
pub use settings::*;
