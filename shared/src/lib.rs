pub mod direction;
pub use self::direction::Direction;

pub mod position;
pub use self::position::Position;
