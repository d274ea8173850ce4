mod fixture;
mod registry;
mod wire;
