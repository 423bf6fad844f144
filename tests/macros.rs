//! Declarative test macros in the teacher's idiom (`tests/content-exists.rs`
//! calls `test!`/`error!`, but the retrieved pack didn't include the
//! `macros` module backing them -- rebuilt here against this crate's own
//! `compile`/`LessError` API).

macro_rules! test {
    ($(#[$attr:meta])* $name:ident, $input:expr, $output:expr) => {
        $(#[$attr])*
        #[test]
        fn $name() {
            let css = less::compile($input, &less::CompileOptions::default())
                .unwrap_or_else(|e| panic!("expected compilation to succeed, got error: {}", e));
            assert_eq!(css, $output);
        }
    };
}

macro_rules! error {
    ($(#[$attr:meta])* $name:ident, $input:expr, $message:expr) => {
        $(#[$attr])*
        #[test]
        fn $name() {
            let err = less::compile($input, &less::CompileOptions::default())
                .expect_err("expected compilation to fail");
            assert_eq!(err.message(), $message);
        }
    };
}
