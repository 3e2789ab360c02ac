//! Virtual-key-code translation.
//!
//! Maps raw Windows virtual key codes to the canonical key names used by
//! browser `KeyboardEvent.key` values, so consumers see `"Enter"` rather
//! than `0x0D` regardless of keyboard layout.

/// Virtual key codes from WinUser.h that translate to fixed names.
///
/// Defined locally as plain integers so translation stays callable (and
/// testable) on any platform.
mod vk {
    /// Mouse buttons share the virtual-key code space with keyboard keys.
    pub const LBUTTON: u32 = 0x01;
    pub const RBUTTON: u32 = 0x02;

    pub const BACK: u32 = 0x08;
    pub const TAB: u32 = 0x09;
    pub const RETURN: u32 = 0x0D;
    pub const SHIFT: u32 = 0x10;
    pub const CONTROL: u32 = 0x11;
    pub const MENU: u32 = 0x12;
    pub const CAPITAL: u32 = 0x14;
    pub const ESCAPE: u32 = 0x1B;
    pub const SPACE: u32 = 0x20;
    pub const PRIOR: u32 = 0x21;
    pub const NEXT: u32 = 0x22;
    pub const END: u32 = 0x23;
    pub const HOME: u32 = 0x24;
    pub const LEFT: u32 = 0x25;
    pub const UP: u32 = 0x26;
    pub const RIGHT: u32 = 0x27;
    pub const DOWN: u32 = 0x28;
    pub const SNAPSHOT: u32 = 0x2C;
    pub const INSERT: u32 = 0x2D;
    pub const DELETE: u32 = 0x2E;
    pub const LWIN: u32 = 0x5B;
    pub const RWIN: u32 = 0x5C;
    pub const SUBTRACT: u32 = 0x6D;
    pub const DECIMAL: u32 = 0x6E;
    pub const F1: u32 = 0x70;
    pub const F20: u32 = 0x83;
    pub const LSHIFT: u32 = 0xA0;
    pub const RSHIFT: u32 = 0xA1;
    pub const LCONTROL: u32 = 0xA2;
    pub const RCONTROL: u32 = 0xA3;
    pub const LMENU: u32 = 0xA4;
    pub const RMENU: u32 = 0xA5;
    pub const OEM_MINUS: u32 = 0xBD;
    pub const OEM_PERIOD: u32 = 0xBE;
}

/// Translate a virtual key code to its canonical name.
///
/// Mouse button codes interleaved into the key space translate to the
/// empty string, as do codes the active keyboard layout cannot resolve to
/// a printable character; sessions drop those instead of dispatching them.
/// Stateless, and safe to call outside any hook context.
pub fn key_name(vk_code: u32) -> String {
    let name = match vk_code {
        vk::LBUTTON | vk::RBUTTON => "",
        vk::MENU | vk::LMENU | vk::RMENU => "Alt",
        vk::LWIN | vk::RWIN => "Meta",
        vk::BACK => "Backspace",
        vk::RETURN => "Enter",
        vk::SPACE => "Spacebar",
        vk::TAB => "Tab",
        vk::SHIFT | vk::LSHIFT | vk::RSHIFT => "Shift",
        vk::CONTROL | vk::LCONTROL | vk::RCONTROL => "Control",
        vk::ESCAPE => "Escape",
        vk::END => "End",
        vk::HOME => "Home",
        vk::LEFT => "ArrowLeft",
        vk::UP => "ArrowUp",
        vk::RIGHT => "ArrowRight",
        vk::DOWN => "ArrowDown",
        vk::CAPITAL => "CapsLock",
        vk::PRIOR => "PageUp",
        vk::NEXT => "PageDown",
        vk::DELETE => "Delete",
        vk::INSERT => "Insert",
        vk::SNAPSHOT => "PrintScreen",
        vk::OEM_PERIOD | vk::DECIMAL => ".",
        vk::OEM_MINUS | vk::SUBTRACT => "-",
        vk::F1..=vk::F20 => return format!("F{}", vk_code - vk::F1 + 1),
        _ => return layout_char(vk_code),
    };
    name.to_string()
}

/// Resolve a code through the active keyboard layout.
///
/// Yields the empty string when the layout has no printable character for
/// the code (dead keys, media keys, and similar).
#[cfg(target_os = "windows")]
fn layout_char(vk_code: u32) -> String {
    use windows::Win32::UI::Input::KeyboardAndMouse::{
        GetKeyboardLayout, MapVirtualKeyExW, MAPVK_VK_TO_CHAR,
    };

    let mapped = unsafe { MapVirtualKeyExW(vk_code, MAPVK_VK_TO_CHAR, GetKeyboardLayout(0)) };
    if mapped == 0 {
        return String::new();
    }
    // The low word is the character; bit 31 flags a dead key.
    match char::from_u32(mapped & 0xFFFF) {
        Some(ch) if !ch.is_control() => ch.to_string(),
        _ => String::new(),
    }
}

#[cfg(not(target_os = "windows"))]
fn layout_char(_vk_code: u32) -> String {
    String::new()
}
