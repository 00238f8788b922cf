#![macro_use]

/// Declare a radio operation record.
///
/// The common radio operation header is spliced in field by field rather than
/// embedded as a struct, so the command specific fields start at byte 14 like
/// in the RF core firmware's headers.
macro_rules! radio_op {
    (
        $(#[$attr:meta])*
        pub struct $name:ident {
            $(
                $(#[$fattr:meta])*
                pub $field:ident: $ty:ty,
            )*
        }
    ) => {
        $(#[$attr])*
        #[repr(C, align(4))]
        #[derive(Debug, Clone, Copy)]
        pub struct $name {
            /// Command number.
            pub command_no: u16,
            /// Written by the RF core while the record is submitted.
            pub status: crate::rfc::Status,
            /// Next record in a chain; unused by this crate.
            pub next_op: *mut crate::rfc::cmd::RadioOp,
            /// Absolute or relative start time in radio timer ticks.
            pub start_time: u32,
            pub start_trigger: crate::rfc::cmd::Trigger,
            pub condition: crate::rfc::cmd::Condition,
            $(
                $(#[$fattr])*
                pub $field: $ty,
            )*
        }
    };
}

/// Implement `RadioCommand` for a record declared with `radio_op!`.
macro_rules! impl_radio_command {
    ($name:ident, $command_no:expr) => {
        unsafe impl crate::rfc::cmd::RadioCommand for $name {
            const COMMAND_NO: u16 = $command_no;
        }
    };
}

/// Compile-time layout checks against the RF core's 32-bit view.
///
/// Word alignment is checked on every target, since CMDR only takes 4-byte
/// aligned record addresses.
macro_rules! assert_layout {
    ($name:ident, size = $size:expr $(, $field:ident @ $offset:expr)* $(,)?) => {
        const _: () = ::core::assert!(::core::mem::align_of::<$name>() >= 4);

        #[cfg(target_pointer_width = "32")]
        const _: () = {
            ::core::assert!(::core::mem::size_of::<$name>() == $size);
            $(
                ::core::assert!(::core::mem::offset_of!($name, $field) == $offset);
            )*
        };
    };
}
