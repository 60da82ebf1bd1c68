//! Keyboard event capture, key identities and remapping

mod axis;
mod event;
pub mod keymap;
pub mod remap;

pub use axis::{axis_of, opposite_of, Axis, LogicalKey};
pub use event::{spawn_capture, Clock, KeyEvent, KeyEventType, KeyboardListener, Timestamp};
pub use keymap::PhysicalKey;
pub use remap::{KeyMapping, KeyRemapper};
