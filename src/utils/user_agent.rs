//! Device classification for device targeting.

use crate::domain::entities::DeviceClass;
use woothee::parser::Parser;

/// Classifies a `User-Agent` header into mobile, tablet or desktop.
///
/// Woothee reports phones and tablets alike as `smartphone`, so tablets are
/// told apart by the iPad OS, an explicit `Tablet` token, or an Android UA
/// without the `Mobile` token. Missing, empty or unrecognised agents count
/// as desktop.
pub fn classify_device(user_agent: Option<&str>) -> DeviceClass {
    let Some(ua) = user_agent.map(str::trim).filter(|ua| !ua.is_empty()) else {
        return DeviceClass::Desktop;
    };

    let Some(parsed) = Parser::new().parse(ua) else {
        return fallback_classify(ua);
    };

    let is_android = parsed.os == "Android" || ua.contains("Android");
    if parsed.os == "iPad"
        || ua.contains("iPad")
        || ua.contains("Tablet")
        || (is_android && !ua.contains("Mobile"))
    {
        return DeviceClass::Tablet;
    }

    match parsed.category {
        "smartphone" | "mobilephone" => DeviceClass::Mobile,
        _ => fallback_classify(ua),
    }
}

fn fallback_classify(ua: &str) -> DeviceClass {
    if ua.contains("iPad") || ua.contains("Tablet") {
        DeviceClass::Tablet
    } else if ua.contains("Mobile") || ua.contains("iPhone") {
        DeviceClass::Mobile
    } else {
        DeviceClass::Desktop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const IPAD: &str = "Mozilla/5.0 (iPad; CPU OS 16_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Mobile/15E148 Safari/604.1";
    const ANDROID_PHONE: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";
    const ANDROID_TABLET: &str = "Mozilla/5.0 (Linux; Android 13; SM-X700) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const WINDOWS_CHROME: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    #[test]
    fn test_phones_are_mobile() {
        assert_eq!(classify_device(Some(IPHONE)), DeviceClass::Mobile);
        assert_eq!(classify_device(Some(ANDROID_PHONE)), DeviceClass::Mobile);
    }

    #[test]
    fn test_tablets() {
        assert_eq!(classify_device(Some(IPAD)), DeviceClass::Tablet);
        assert_eq!(classify_device(Some(ANDROID_TABLET)), DeviceClass::Tablet);
    }

    #[test]
    fn test_desktop_and_missing() {
        assert_eq!(classify_device(Some(WINDOWS_CHROME)), DeviceClass::Desktop);
        assert_eq!(classify_device(None), DeviceClass::Desktop);
        assert_eq!(classify_device(Some("   ")), DeviceClass::Desktop);
        assert_eq!(classify_device(Some("curl/8.4.0")), DeviceClass::Desktop);
    }
}
