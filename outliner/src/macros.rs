#[cfg(feature = "tracing")]
macro_rules! otrace {
    ($($tt:tt)*) => {
        tracing::trace!(target: "outliner", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! otrace {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! odebug {
    ($($tt:tt)*) => {
        tracing::debug!(target: "outliner", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! odebug {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! owarn {
    ($($tt:tt)*) => {
        tracing::warn!(target: "outliner", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! owarn {
    ($($tt:tt)*) => {};
}
