use crate::foundation::core::Rgba8;

/// The 16 ANSI colors in xterm order: 0-7 normal, 8-15 bright.
const ANSI16: [[u8; 3]; 16] = [
    [0, 0, 0],
    [128, 0, 0],
    [0, 128, 0],
    [128, 128, 0],
    [0, 0, 128],
    [128, 0, 128],
    [0, 128, 128],
    [192, 192, 192],
    [128, 128, 128],
    [255, 0, 0],
    [0, 255, 0],
    [255, 255, 0],
    [0, 0, 255],
    [255, 0, 255],
    [0, 255, 255],
    [255, 255, 255],
];

const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

/// Entry `index` of the xterm 256-color palette.
pub fn xterm256(index: u8) -> Rgba8 {
    match index {
        0..=15 => {
            let [r, g, b] = ANSI16[usize::from(index)];
            Rgba8::opaque(r, g, b)
        }
        16..=231 => {
            let i = index - 16;
            Rgba8::opaque(
                CUBE_LEVELS[usize::from(i / 36)],
                CUBE_LEVELS[usize::from((i / 6) % 6)],
                CUBE_LEVELS[usize::from(i % 6)],
            )
        }
        232..=255 => {
            let v = 8 + (index - 232) * 10;
            Rgba8::opaque(v, v, v)
        }
    }
}

/// Basic palette letter used by `$N` codes.
///
/// Lowercase letters are the normal ANSI colors, uppercase the bright ones.
pub(crate) fn basic_letter(c: char) -> Option<Rgba8> {
    let slot = match c.to_ascii_lowercase() {
        'k' => 0,
        'r' => 1,
        'g' => 2,
        'y' => 3,
        'b' => 4,
        'm' => 5,
        'c' => 6,
        'w' => 7,
        _ => return None,
    };
    let index = if c.is_ascii_uppercase() { slot + 8 } else { slot };
    Some(xterm256(index))
}
