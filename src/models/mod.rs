pub mod ids;
pub mod movie;
pub mod ticket;

pub use ids::{InvalidInput, MovieId, SeatId};
pub use movie::{Movie, MovieUpdate, NewMovie};
pub use ticket::{SeatStatus, SoldTicket, Ticket};
