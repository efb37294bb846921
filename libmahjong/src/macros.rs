/// Maps a tile literal such as `3m`, `E` or `2f` to its `u8` id at compile
/// time.
#[macro_export]
macro_rules! tu8 {
    (1m) => { 0_u8 };
    (2m) => { 1_u8 };
    (3m) => { 2_u8 };
    (4m) => { 3_u8 };
    (5m) => { 4_u8 };
    (6m) => { 5_u8 };
    (7m) => { 6_u8 };
    (8m) => { 7_u8 };
    (9m) => { 8_u8 };

    (1p) => { 9_u8 };
    (2p) => { 10_u8 };
    (3p) => { 11_u8 };
    (4p) => { 12_u8 };
    (5p) => { 13_u8 };
    (6p) => { 14_u8 };
    (7p) => { 15_u8 };
    (8p) => { 16_u8 };
    (9p) => { 17_u8 };

    (1s) => { 18_u8 };
    (2s) => { 19_u8 };
    (3s) => { 20_u8 };
    (4s) => { 21_u8 };
    (5s) => { 22_u8 };
    (6s) => { 23_u8 };
    (7s) => { 24_u8 };
    (8s) => { 25_u8 };
    (9s) => { 26_u8 };

    (E) => { 27_u8 };
    (S) => { 28_u8 };
    (W) => { 29_u8 };
    (N) => { 30_u8 };
    (P) => { 31_u8 };
    (F) => { 32_u8 };
    (C) => { 33_u8 };

    (1f) => { 34_u8 };
    (2f) => { 35_u8 };
    (3f) => { 36_u8 };
    (4f) => { 37_u8 };
    (5f) => { 38_u8 };
    (6f) => { 39_u8 };
    (7f) => { 40_u8 };
    (8f) => { 41_u8 };

    (?) => { 42_u8 };

    ($($any:tt)*) => {
        ::std::compile_error!(::std::concat!("invalid tile: ", ::std::stringify!($($any)*)))
    };
}

/// `t!(3m)` builds a single tile, `t![3m, 4m, E]` builds an array.
#[macro_export]
macro_rules! t {
    ($s:tt) => {
        $crate::tile::Tile::new_unchecked($crate::tu8!($s))
    };
    ($($s:tt),* $(,)?) => {
        [$($crate::t!($s)),*]
    };
}

/// Converts a runtime id into a tile, panicking on an invalid id. Only use
/// it on ids produced by iterating a 43-sized table.
#[macro_export]
macro_rules! must_tile {
    ($id:expr) => {
        $crate::tile::Tile::try_from($id).expect("tile id out of range")
    };
}

#[macro_export]
macro_rules! matches_tu8 {
    ($o:expr, $($s:tt)|*) => {
        matches!($o, $($crate::tu8!($s))|*)
    };
}
