pub mod case;
pub mod evidence;
pub mod investigation;
pub mod leads;
pub mod queries;
pub mod time;
pub mod truth;
