#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)+) => {};
}

#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)+) => {};
}
