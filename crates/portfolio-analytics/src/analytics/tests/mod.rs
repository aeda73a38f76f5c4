mod common;
mod occupancy;
mod routing;
mod service;
