//! Runtime pieces shared by the prompts: input exchange, session, pagination.

pub mod input_slot;
pub mod paginate;
pub mod session;

pub use input_slot::{InputSlot, InterruptHandle, SlotWriter};
pub use paginate::paginate;
pub use session::Session;
