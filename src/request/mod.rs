mod body;
mod executor;
mod options;

pub use body::{FormPart, FormValue, RequestBody};
pub use executor::RequestExecutor;
pub use options::RequestOptions;
