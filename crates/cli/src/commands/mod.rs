pub mod results;
pub mod session;
pub mod util;
pub mod view;
pub mod workspace;

pub use results::*;
pub use session::*;
pub use util::*;
pub use view::*;
pub use workspace::*;
