pub mod game_players;
pub mod games;
pub mod round_scores;
pub mod rounds;
pub mod sea_orm_active_enums;
pub mod users;
