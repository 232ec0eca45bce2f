mod aspect_ratio;
pub use aspect_ratio::*;

mod nal_unit_type;
pub use nal_unit_type::*;

mod parallelism_type;
pub use parallelism_type::*;

mod constant_frame_rate;
pub use constant_frame_rate::*;

mod profile_compatibility_flags;
pub use profile_compatibility_flags::*;
