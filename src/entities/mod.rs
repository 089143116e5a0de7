// Entity Models
//
// Plain records the engine reads. They are never mutated in place: edits
// produce a new value (`shared_with`, `with_member`, `deactivated`, ...).

pub mod card;
pub mod category;
pub mod group;
pub mod transaction;

pub use card::{Brand, CreditCard};
pub use category::Category;
pub use group::{Group, GroupMember, Role};
pub use transaction::{PaymentMethod, PaymentType, Transaction, TransactionRecord};
