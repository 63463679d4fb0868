//! Host keyboard to PS/2 set-2 scancode translation.

use sdl2::keyboard::Scancode;

/// Map an SDL scancode to `(set-2 code, extended)`. Keys outside the map
/// are dropped.
pub fn translate(scancode: Scancode) -> Option<(u8, bool)> {
    use Scancode::*;
    let plain = |code| Some((code, false));
    let ext = |code| Some((code, true));
    match scancode {
        A => plain(0x1C),
        B => plain(0x32),
        C => plain(0x21),
        D => plain(0x23),
        E => plain(0x24),
        F => plain(0x2B),
        G => plain(0x34),
        H => plain(0x33),
        I => plain(0x43),
        J => plain(0x3B),
        K => plain(0x42),
        L => plain(0x4B),
        M => plain(0x3A),
        N => plain(0x31),
        O => plain(0x44),
        P => plain(0x4D),
        Q => plain(0x15),
        R => plain(0x2D),
        S => plain(0x1B),
        T => plain(0x2C),
        U => plain(0x3C),
        V => plain(0x2A),
        W => plain(0x1D),
        X => plain(0x22),
        Y => plain(0x35),
        Z => plain(0x1A),

        Num1 => plain(0x16),
        Num2 => plain(0x1E),
        Num3 => plain(0x26),
        Num4 => plain(0x25),
        Num5 => plain(0x2E),
        Num6 => plain(0x36),
        Num7 => plain(0x3D),
        Num8 => plain(0x3E),
        Num9 => plain(0x46),
        Num0 => plain(0x45),

        Return => plain(0x5A),
        Escape => plain(0x76),
        Backspace => plain(0x66),
        Tab => plain(0x0D),
        Space => plain(0x29),
        Minus => plain(0x4E),
        Equals => plain(0x55),
        LeftBracket => plain(0x54),
        RightBracket => plain(0x5B),
        Backslash => plain(0x5D),
        Semicolon => plain(0x4C),
        Apostrophe => plain(0x52),
        Grave => plain(0x0E),
        Comma => plain(0x41),
        Period => plain(0x49),
        Slash => plain(0x4A),
        CapsLock => plain(0x58),

        F1 => plain(0x05),
        F2 => plain(0x06),
        F3 => plain(0x04),
        F4 => plain(0x0C),
        F5 => plain(0x03),
        F6 => plain(0x0B),
        F7 => plain(0x83),
        F8 => plain(0x0A),
        F9 => plain(0x01),
        F10 => plain(0x09),
        F11 => plain(0x78),
        F12 => plain(0x07),

        LShift => plain(0x12),
        RShift => plain(0x59),
        LCtrl => plain(0x14),
        LAlt => plain(0x11),

        RCtrl => ext(0x14),
        RAlt => ext(0x11),
        LGui => ext(0x1F),
        RGui => ext(0x27),

        Insert => ext(0x70),
        Home => ext(0x6C),
        PageUp => ext(0x7D),
        Delete => ext(0x71),
        End => ext(0x69),
        PageDown => ext(0x7A),
        Up => ext(0x75),
        Left => ext(0x6B),
        Down => ext(0x72),
        Right => ext(0x74),

        _ => None,
    }
}

/// Map an SDL mouse button to the PS/2 packet bit (0 left, 1 right,
/// 2 middle).
pub fn mouse_button(button: sdl2::mouse::MouseButton) -> Option<u8> {
    match button {
        sdl2::mouse::MouseButton::Left => Some(0),
        sdl2::mouse::MouseButton::Right => Some(1),
        sdl2::mouse::MouseButton::Middle => Some(2),
        _ => None,
    }
}
