//! Macros for generating log messages. Each takes an optional leading
//! threshold; omitting it logs at threshold 0, which is always emitted.

#[macro_export]
macro_rules! error {
    ($threshold:expr, $($arg:tt)+) => {
        {
            $crate::log::init_logger();
            tracing::event!(
                tracing::Level::ERROR,
                threshold = $threshold,
                message = format_args!($($arg)+)
            );
        }
    };
    ($($arg:tt)+) => {
        {
            $crate::log::init_logger();
            tracing::event!(
                tracing::Level::ERROR,
                threshold = 0,
                message = format_args!($($arg)+)
            );
        }
    };
}

#[macro_export]
macro_rules! warning {
    ($threshold:expr, $($arg:tt)+) => {
        {
            $crate::log::init_logger();
            tracing::event!(
                tracing::Level::WARN,
                threshold = $threshold,
                message = format_args!($($arg)+)
            );
        }
    };
    ($($arg:tt)+) => {
        {
            $crate::log::init_logger();
            tracing::event!(
                tracing::Level::WARN,
                threshold = 0,
                message = format_args!($($arg)+)
            );
        }
    };
}

#[macro_export]
macro_rules! info {
    ($threshold:expr, $($arg:tt)+) => {
        {
            $crate::log::init_logger();
            tracing::event!(
                tracing::Level::INFO,
                threshold = $threshold,
                message = format_args!($($arg)+)
            );
        }
    };
    ($($arg:tt)+) => {
        {
            $crate::log::init_logger();
            tracing::event!(
                tracing::Level::INFO,
                threshold = 0,
                message = format_args!($($arg)+)
            );
        }
    };
}

#[macro_export]
macro_rules! debug {
    ($threshold:expr, $($arg:tt)+) => {
        {
            $crate::log::init_logger();
            tracing::event!(
                tracing::Level::DEBUG,
                threshold = $threshold,
                message = format_args!($($arg)+)
            );
        }
    };
    ($($arg:tt)+) => {
        {
            $crate::log::init_logger();
            tracing::event!(
                tracing::Level::DEBUG,
                threshold = 0,
                message = format_args!($($arg)+)
            );
        }
    };
}

#[macro_export]
macro_rules! trace {
    ($threshold:expr, $($arg:tt)+) => {
        {
            $crate::log::init_logger();
            tracing::event!(
                tracing::Level::TRACE,
                threshold = $threshold,
                message = format_args!($($arg)+)
            );
        }
    };
    ($($arg:tt)+) => {
        {
            $crate::log::init_logger();
            tracing::event!(
                tracing::Level::TRACE,
                threshold = 0,
                message = format_args!($($arg)+)
            );
        }
    };
}


// The following makes the macros importable directly from the `log` module.
pub use {error, warning, info, debug, trace};
