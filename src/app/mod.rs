macro_rules! lock {
    ($name: expr) => {
        match $name.lock() {
            Ok(locked) => locked,
            Err(e) => panic!("{:#?}", e),
        }
    };
}

pub mod context;
pub mod error;
pub mod event;
pub mod feature;
pub mod group;
pub mod hooks;
pub mod replay;
pub mod tracker;
