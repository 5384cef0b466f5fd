pub mod health;
pub use self::health::health;

pub mod verify_access;
pub use self::verify_access::verify_access;

pub mod game;
pub use self::game::game;
