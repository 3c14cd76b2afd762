mod backoffice_world;
mod setups;
mod steps;

pub use backoffice_world::BackofficeWorld;
