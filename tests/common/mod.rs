pub const FIB: &str = include_str!("../../c0/fib.c0");
