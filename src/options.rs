mod option_key;
mod options_map;

pub use option_key::{OptionKey, OptionScope};
pub use options_map::{Options, OptionsBuilder};
