pub mod optimise;
