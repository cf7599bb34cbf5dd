/// Bold emphasis, `**bold**`.
pub struct Strong;

impl Strong {
    pub const DELIM: &'static [u8; 2] = b"**";
}

/// Italic emphasis, `*italic*` or `_italic_`.
pub struct Emphasis;

impl Emphasis {
    pub const STAR: &'static [u8; 1] = b"*";
    pub const UNDERSCORE: &'static [u8; 1] = b"_";
}

/// Strikethrough, `~~struck~~`.
pub struct Strike;

impl Strike {
    pub const DELIM: &'static [u8; 2] = b"~~";
}
