//! JSON-subset parser for control datagrams.
//!
//! Decodes the three message kinds into a [`Command`] in a single pass over
//! the datagram bytes. The accepted grammar is the subset dashboard software
//! actually sends: objects, arrays, strings, integers and the bare literals,
//! with arbitrary whitespace and key order.

use heapless::Vec;
use smart_leds::RGB8;

use crate::command::{Command, Effect, LedUpdate, MAX_LED_UPDATES};

/// Largest datagram the protocol accepts; the listener's receive buffer size.
pub const MAX_DATAGRAM_LEN: usize = 1024;

/// Nesting bound when skipping unknown values (keeps recursion bounded).
const MAX_SKIP_DEPTH: u8 = 8;

/// Error type for datagram decoding.
///
/// Every variant means the whole message is dropped; the distinction exists
/// for the listener's log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Broken JSON: bad token, unterminated string, trailing garbage, or
    /// nesting beyond the skip bound.
    Syntax,
    /// The `type` field names no known message kind.
    UnknownType,
    /// The `effect` field names no known effect tag.
    UnknownEffect,
    /// A `color` value is neither `"#RRGGBB"` nor a `[r,g,b]` array.
    InvalidColor,
    /// A required field for the message kind is absent.
    MissingField,
    /// More led entries than [`MAX_LED_UPDATES`].
    TooManyLeds,
}

/// Decode one datagram into a [`Command`].
///
/// # Example
///
/// ```
/// use simhub_proto::{parse, Command, Effect};
///
/// let cmd = parse(br#"{"type":"effect","effect":"REACTIVE"}"#).unwrap();
/// assert_eq!(cmd, Command::SetEffect(Effect::Reactive));
/// ```
pub fn parse(datagram: &[u8]) -> Result<Command, ParseError> {
    let mut cur = Cursor::new(datagram);
    cur.expect(b'{')?;

    let mut msg_type: Option<&[u8]> = None;
    let mut effect_tag: Option<&[u8]> = None;
    let mut brightness: Option<i64> = None;
    let mut leds: Option<Vec<LedUpdate, MAX_LED_UPDATES>> = None;

    cur.skip_ws();
    if cur.peek() == Some(b'}') {
        cur.pos += 1;
    } else {
        loop {
            let key = cur.string()?;
            cur.expect(b':')?;
            match key {
                b"type" => msg_type = Some(cur.string()?),
                b"effect" => effect_tag = Some(cur.string()?),
                b"value" => brightness = Some(cur.integer()?),
                b"leds" => leds = Some(led_list(&mut cur)?),
                _ => cur.skip_value(MAX_SKIP_DEPTH)?,
            }
            cur.skip_ws();
            match cur.bump()? {
                b',' => {}
                b'}' => break,
                _ => return Err(ParseError::Syntax),
            }
        }
    }

    cur.skip_ws();
    if !cur.at_end() {
        return Err(ParseError::Syntax);
    }

    match msg_type.ok_or(ParseError::MissingField)? {
        b"led" => Ok(Command::SetLeds(leds.ok_or(ParseError::MissingField)?)),
        b"effect" => {
            let tag = effect_tag.ok_or(ParseError::MissingField)?;
            let effect = Effect::from_tag(tag).ok_or(ParseError::UnknownEffect)?;
            Ok(Command::SetEffect(effect))
        }
        b"brightness" => {
            let value = brightness.ok_or(ParseError::MissingField)?;
            Ok(Command::SetBrightness(value.clamp(0, 255) as u8))
        }
        _ => Err(ParseError::UnknownType),
    }
}

/// Parse the `leds` array, skipping entries the protocol tolerates losing.
fn led_list(cur: &mut Cursor<'_>) -> Result<Vec<LedUpdate, MAX_LED_UPDATES>, ParseError> {
    let mut out = Vec::new();
    cur.expect(b'[')?;
    cur.skip_ws();
    if cur.peek() == Some(b']') {
        cur.pos += 1;
        return Ok(out);
    }
    loop {
        if let Some(update) = led_entry(cur)? {
            out.push(update).map_err(|_| ParseError::TooManyLeds)?;
        }
        cur.skip_ws();
        match cur.bump()? {
            b',' => {}
            b']' => break,
            _ => return Err(ParseError::Syntax),
        }
    }
    Ok(out)
}

/// Parse one `{"id":...,"color":...}` entry.
///
/// Returns `None` for entries that are dropped individually: a missing `id`
/// or `color` key, or an id no strip could index. Malformed values remain
/// fatal for the whole message.
fn led_entry(cur: &mut Cursor<'_>) -> Result<Option<LedUpdate>, ParseError> {
    cur.expect(b'{')?;
    let mut id: Option<i64> = None;
    let mut color: Option<RGB8> = None;

    cur.skip_ws();
    if cur.peek() == Some(b'}') {
        cur.pos += 1;
        return Ok(None);
    }
    loop {
        let key = cur.string()?;
        cur.expect(b':')?;
        match key {
            b"id" => id = Some(cur.integer()?),
            b"color" => color = Some(color_value(cur)?),
            _ => cur.skip_value(MAX_SKIP_DEPTH)?,
        }
        cur.skip_ws();
        match cur.bump()? {
            b',' => {}
            b'}' => break,
            _ => return Err(ParseError::Syntax),
        }
    }

    match (id, color) {
        (Some(id), Some(color)) if (0..=i64::from(u16::MAX)).contains(&id) => {
            Ok(Some(LedUpdate {
                index: id as u16,
                color,
            }))
        }
        _ => Ok(None),
    }
}

/// Parse a color in either wire form.
fn color_value(cur: &mut Cursor<'_>) -> Result<RGB8, ParseError> {
    cur.skip_ws();
    match cur.peek() {
        Some(b'"') => hex_color(cur.string()?),
        Some(b'[') => rgb_array(cur),
        _ => Err(ParseError::InvalidColor),
    }
}

/// Parse a `[r,g,b]` array; channels clamp to 0..=255, extra elements are
/// tolerated and ignored.
fn rgb_array(cur: &mut Cursor<'_>) -> Result<RGB8, ParseError> {
    cur.expect(b'[')?;
    let mut channels = [0u8; 3];
    let mut n = 0usize;
    cur.skip_ws();
    if cur.peek() == Some(b']') {
        cur.pos += 1;
        return Err(ParseError::InvalidColor);
    }
    loop {
        if n < 3 {
            channels[n] = cur.integer()?.clamp(0, 255) as u8;
        } else {
            cur.skip_value(MAX_SKIP_DEPTH)?;
        }
        n += 1;
        cur.skip_ws();
        match cur.bump()? {
            b',' => {}
            b']' => break,
            _ => return Err(ParseError::Syntax),
        }
    }
    if n < 3 {
        return Err(ParseError::InvalidColor);
    }
    Ok(RGB8::new(channels[0], channels[1], channels[2]))
}

/// Parse a `#RRGGBB` hex string.
#[inline]
fn hex_color(s: &[u8]) -> Result<RGB8, ParseError> {
    if s.len() != 7 || s[0] != b'#' {
        return Err(ParseError::InvalidColor);
    }
    let r = hex_pair(s[1], s[2])?;
    let g = hex_pair(s[3], s[4])?;
    let b = hex_pair(s[5], s[6])?;
    Ok(RGB8::new(r, g, b))
}

/// Combine two hex characters into a byte.
#[inline]
fn hex_pair(high: u8, low: u8) -> Result<u8, ParseError> {
    Ok((hex_digit(high)? << 4) | hex_digit(low)?)
}

/// Convert a hex character to its value.
#[inline]
fn hex_digit(b: u8) -> Result<u8, ParseError> {
    match b {
        b'0'..=b'9' => Ok(b - b'0'),
        b'A'..=b'F' => Ok(b - b'A' + 10),
        b'a'..=b'f' => Ok(b - b'a' + 10),
        _ => Err(ParseError::InvalidColor),
    }
}

/// Byte cursor over one datagram.
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    /// Consume and return the next byte.
    #[inline]
    fn bump(&mut self) -> Result<u8, ParseError> {
        let b = self.peek().ok_or(ParseError::Syntax)?;
        self.pos += 1;
        Ok(b)
    }

    #[inline]
    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    /// Consume the next non-whitespace byte, requiring it to be `expected`.
    #[inline]
    fn expect(&mut self, expected: u8) -> Result<(), ParseError> {
        self.skip_ws();
        if self.bump()? != expected {
            return Err(ParseError::Syntax);
        }
        Ok(())
    }

    #[inline]
    fn at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Parse a JSON string, returning the raw bytes between the quotes.
    ///
    /// Escape sequences are skipped over but not decoded; none of the
    /// keywords or color forms the protocol matches against contain them, so
    /// an escaped string simply fails whatever match comes next.
    fn string(&mut self) -> Result<&'a [u8], ParseError> {
        self.expect(b'"')?;
        let start = self.pos;
        loop {
            match self.bump()? {
                b'"' => return Ok(&self.buf[start..self.pos - 1]),
                b'\\' => {
                    self.bump()?;
                }
                _ => {}
            }
        }
    }

    /// Parse a (possibly negative) integer with checked arithmetic.
    fn integer(&mut self) -> Result<i64, ParseError> {
        self.skip_ws();
        let negative = if self.peek() == Some(b'-') {
            self.pos += 1;
            true
        } else {
            false
        };

        let mut value: i64 = 0;
        let mut digits = 0usize;
        while let Some(b @ b'0'..=b'9') = self.peek() {
            self.pos += 1;
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(i64::from(b - b'0')))
                .ok_or(ParseError::Syntax)?;
            digits += 1;
        }
        if digits == 0 {
            return Err(ParseError::Syntax);
        }
        Ok(if negative { -value } else { value })
    }

    /// Consume the exact byte sequence `lit`.
    fn literal(&mut self, lit: &[u8]) -> Result<(), ParseError> {
        for &b in lit {
            if self.bump()? != b {
                return Err(ParseError::Syntax);
            }
        }
        Ok(())
    }

    /// Skip any JSON value without interpreting it.
    fn skip_value(&mut self, depth: u8) -> Result<(), ParseError> {
        if depth == 0 {
            return Err(ParseError::Syntax);
        }
        self.skip_ws();
        match self.peek().ok_or(ParseError::Syntax)? {
            b'"' => self.string().map(|_| ()),
            b'{' => {
                self.pos += 1;
                self.skip_ws();
                if self.peek() == Some(b'}') {
                    self.pos += 1;
                    return Ok(());
                }
                loop {
                    self.string()?;
                    self.expect(b':')?;
                    self.skip_value(depth - 1)?;
                    self.skip_ws();
                    match self.bump()? {
                        b',' => {}
                        b'}' => return Ok(()),
                        _ => return Err(ParseError::Syntax),
                    }
                }
            }
            b'[' => {
                self.pos += 1;
                self.skip_ws();
                if self.peek() == Some(b']') {
                    self.pos += 1;
                    return Ok(());
                }
                loop {
                    self.skip_value(depth - 1)?;
                    self.skip_ws();
                    match self.bump()? {
                        b',' => {}
                        b']' => return Ok(()),
                        _ => return Err(ParseError::Syntax),
                    }
                }
            }
            b't' => self.literal(b"true"),
            b'f' => self.literal(b"false"),
            b'n' => self.literal(b"null"),
            b'-' | b'0'..=b'9' => self.integer().map(|_| ()),
            _ => Err(ParseError::Syntax),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::format;
    use std::string::String;

    use super::*;

    #[test]
    fn test_parse_led_hex_color() {
        let cmd = parse(br##"{"type":"led","leds":[{"id":0,"color":"#FF0000"}]}"##).unwrap();
        match cmd {
            Command::SetLeds(leds) => {
                assert_eq!(leds.len(), 1);
                assert_eq!(leds[0].index, 0);
                assert_eq!(leds[0].color, RGB8::new(255, 0, 0));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_led_lowercase_hex() {
        let cmd = parse(br##"{"type":"led","leds":[{"id":2,"color":"#a1b2c3"}]}"##).unwrap();
        match cmd {
            Command::SetLeds(leds) => {
                assert_eq!(leds[0].color, RGB8::new(0xA1, 0xB2, 0xC3));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_led_rgb_array() {
        let cmd = parse(br#"{"type":"led","leds":[{"id":5,"color":[0,128,255]}]}"#).unwrap();
        match cmd {
            Command::SetLeds(leds) => {
                assert_eq!(leds[0].index, 5);
                assert_eq!(leds[0].color, RGB8::new(0, 128, 255));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_rgb_array_channels_clamped() {
        let cmd = parse(br#"{"type":"led","leds":[{"id":0,"color":[300,-5,12]}]}"#).unwrap();
        match cmd {
            Command::SetLeds(leds) => {
                assert_eq!(leds[0].color, RGB8::new(255, 0, 12));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_rgb_array_extra_elements_ignored() {
        let cmd = parse(br#"{"type":"led","leds":[{"id":0,"color":[1,2,3,4,5]}]}"#).unwrap();
        match cmd {
            Command::SetLeds(leds) => {
                assert_eq!(leds[0].color, RGB8::new(1, 2, 3));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_led_multiple_entries() {
        let cmd = parse(
            br##"{"type":"led","leds":[{"id":0,"color":"#010203"},{"id":1,"color":[4,5,6]}]}"##,
        )
        .unwrap();
        match cmd {
            Command::SetLeds(leds) => {
                assert_eq!(leds.len(), 2);
                assert_eq!(leds[0].color, RGB8::new(1, 2, 3));
                assert_eq!(leds[1].color, RGB8::new(4, 5, 6));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_led_entry_missing_key_skipped() {
        // One entry lacks "color", one lacks "id"; the complete entry survives.
        let cmd = parse(
            br##"{"type":"led","leds":[{"id":3},{"color":"#FFFFFF"},{"id":1,"color":"#000000"}]}"##,
        )
        .unwrap();
        match cmd {
            Command::SetLeds(leds) => {
                assert_eq!(leds.len(), 1);
                assert_eq!(leds[0].index, 1);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_led_entry_bad_id_skipped() {
        let cmd = parse(
            br##"{"type":"led","leds":[{"id":-1,"color":"#FFFFFF"},{"id":70000,"color":"#FFFFFF"}]}"##,
        )
        .unwrap();
        match cmd {
            Command::SetLeds(leds) => assert!(leds.is_empty()),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_led_entry_unknown_keys_skipped() {
        let cmd = parse(
            br##"{"type":"led","leds":[{"id":0,"blink":true,"color":"#102030","meta":{"a":[1]}}]}"##,
        )
        .unwrap();
        match cmd {
            Command::SetLeds(leds) => {
                assert_eq!(leds[0].color, RGB8::new(0x10, 0x20, 0x30));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_led_empty_list() {
        let cmd = parse(br#"{"type":"led","leds":[]}"#).unwrap();
        match cmd {
            Command::SetLeds(leds) => assert!(leds.is_empty()),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_led_missing_list() {
        assert_eq!(parse(br#"{"type":"led"}"#), Err(ParseError::MissingField));
    }

    #[test]
    fn test_too_many_led_entries() {
        let mut msg = String::from(r#"{"type":"led","leds":["#);
        for i in 0..=MAX_LED_UPDATES {
            if i > 0 {
                msg.push(',');
            }
            msg.push_str(&format!(r##"{{"id":{i},"color":"#000000"}}"##));
        }
        msg.push_str("]}");
        assert_eq!(parse(msg.as_bytes()), Err(ParseError::TooManyLeds));
    }

    #[test]
    fn test_parse_effect_all_tags() {
        for (tag, effect) in [
            ("STATIC", Effect::Static),
            ("BREATHING", Effect::Breathing),
            ("RAINBOW", Effect::Rainbow),
            ("REACTIVE", Effect::Reactive),
            ("SIMHUB", Effect::Simhub),
        ] {
            let msg = format!(r#"{{"type":"effect","effect":"{tag}"}}"#);
            assert_eq!(parse(msg.as_bytes()), Ok(Command::SetEffect(effect)));
        }
    }

    #[test]
    fn test_parse_effect_unknown() {
        assert_eq!(
            parse(br#"{"type":"effect","effect":"DISCO"}"#),
            Err(ParseError::UnknownEffect)
        );
        // Tags are case-sensitive on the wire.
        assert_eq!(
            parse(br#"{"type":"effect","effect":"rainbow"}"#),
            Err(ParseError::UnknownEffect)
        );
    }

    #[test]
    fn test_parse_effect_missing_field() {
        assert_eq!(parse(br#"{"type":"effect"}"#), Err(ParseError::MissingField));
    }

    #[test]
    fn test_parse_brightness() {
        assert_eq!(
            parse(br#"{"type":"brightness","value":128}"#),
            Ok(Command::SetBrightness(128))
        );
    }

    #[test]
    fn test_brightness_clamped() {
        assert_eq!(
            parse(br#"{"type":"brightness","value":300}"#),
            Ok(Command::SetBrightness(255))
        );
        assert_eq!(
            parse(br#"{"type":"brightness","value":-5}"#),
            Ok(Command::SetBrightness(0))
        );
    }

    #[test]
    fn test_brightness_missing_value() {
        assert_eq!(
            parse(br#"{"type":"brightness"}"#),
            Err(ParseError::MissingField)
        );
    }

    #[test]
    fn test_unknown_type() {
        assert_eq!(
            parse(br#"{"type":"telemetry","value":1}"#),
            Err(ParseError::UnknownType)
        );
    }

    #[test]
    fn test_missing_type() {
        assert_eq!(parse(br#"{"value":1}"#), Err(ParseError::MissingField));
        assert_eq!(parse(b"{}"), Err(ParseError::MissingField));
    }

    #[test]
    fn test_key_order_independent() {
        let cmd = parse(br##"{"leds":[{"color":"#FF0000","id":0}],"type":"led"}"##).unwrap();
        match cmd {
            Command::SetLeds(leds) => assert_eq!(leds[0].color, RGB8::new(255, 0, 0)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_whitespace_tolerated() {
        let cmd = parse(b" { \"type\" : \"brightness\" , \"value\" : 7 } \n").unwrap();
        assert_eq!(cmd, Command::SetBrightness(7));
    }

    #[test]
    fn test_unknown_top_level_keys_skipped() {
        let cmd = parse(
            br#"{"source":"simhub","type":"brightness","value":9,"extra":[{"x":null},true]}"#,
        )
        .unwrap();
        assert_eq!(cmd, Command::SetBrightness(9));
    }

    #[test]
    fn test_invalid_colors() {
        for msg in [
            br#"{"type":"led","leds":[{"id":0,"color":"red"}]}"#.as_slice(),
            br##"{"type":"led","leds":[{"id":0,"color":"#GG0000"}]}"##.as_slice(),
            br##"{"type":"led","leds":[{"id":0,"color":"#FF00"}]}"##.as_slice(),
            br#"{"type":"led","leds":[{"id":0,"color":42}]}"#.as_slice(),
            br#"{"type":"led","leds":[{"id":0,"color":[1,2]}]}"#.as_slice(),
            br#"{"type":"led","leds":[{"id":0,"color":[]}]}"#.as_slice(),
        ] {
            assert_eq!(parse(msg), Err(ParseError::InvalidColor), "{msg:?}");
        }
    }

    #[test]
    fn test_syntax_errors() {
        for msg in [
            b"".as_slice(),
            b"nonsense".as_slice(),
            b"[1,2,3]".as_slice(),
            br#"{"type":"led""#.as_slice(),
            br##"{"type":"led","leds":[{"id":0,"color":"#FF0000"}]} trailing"##.as_slice(),
            br#"{"type":"brightness","value":}"#.as_slice(),
            br#"{"type":"brightness","value":12.5}"#.as_slice(),
            br#"{"type":"brightness" "value":1}"#.as_slice(),
            br#"{"type":"brightness","value":99999999999999999999}"#.as_slice(),
            br#"{"type":"effect","effect":"STATIC"#.as_slice(),
        ] {
            assert_eq!(parse(msg), Err(ParseError::Syntax), "{msg:?}");
        }
    }

    #[test]
    fn test_escaped_string_does_not_derail_cursor() {
        // The escaped quote must not terminate the string early; the value
        // then fails keyword matching like any other unknown tag.
        assert_eq!(
            parse(br#"{"type":"effect","effect":"STA\"TIC"}"#),
            Err(ParseError::UnknownEffect)
        );
    }

    #[test]
    fn test_deeply_nested_unknown_value_rejected() {
        let msg = br#"{"junk":[[[[[[[[[1]]]]]]]]],"type":"brightness","value":1}"#;
        assert_eq!(parse(msg), Err(ParseError::Syntax));
    }
}
