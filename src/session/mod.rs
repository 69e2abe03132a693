pub mod controller;
pub mod result;
pub mod run;
pub mod view;
