pub mod maximization;
