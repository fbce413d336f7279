mod cli;
mod convert;
mod entry;
mod handlers;
mod state;

pub use entry::run;
