//! Carrier tracking URL lookup.
//!
//! Maps a Korean parcel carrier name to its public tracking page for a given
//! tracking number. Used by the storefront order history and the admin
//! console. Unknown carriers return `None` and render as plain text.

/// Carriers offered in the admin tracking form, in display order.
pub const CARRIERS: [&str; 8] = [
    "CJ대한통운",
    "한진택배",
    "롯데택배",
    "우체국택배",
    "GS25편의점택배",
    "로젠택배",
    "경동택배",
    "기타",
];

/// Public tracking URL for a carrier and tracking number.
#[must_use]
pub fn tracking_url(carrier: &str, tracking_number: &str) -> Option<String> {
    if tracking_number.is_empty() {
        return None;
    }
    let url = match carrier {
        "CJ대한통운" => {
            format!("https://nplus.doortodoor.co.kr/web/detail.jsp?slipno={tracking_number}")
        }
        "우체국택배" => format!(
            "https://service.epost.go.kr/trace.RetrieveDomRgiTraceList.comm?sid1={tracking_number}"
        ),
        "로젠택배" => format!("https://www.ilogen.com/web/personal/trace/{tracking_number}"),
        "한진택배" => format!(
            "https://www.hanjin.com/kor/CMS/DeliveryMgr/WaybillResult.do?mCode=MN038&schLang=KR&wblnum={tracking_number}"
        ),
        "롯데택배" => format!(
            "https://www.lotteglogis.com/home/reservation/tracking/link498?InvNo={tracking_number}"
        ),
        "GS25편의점택배" => {
            format!("https://www.cvsnet.co.kr/invoice/tracking.do?invoice_no={tracking_number}")
        }
        "경동택배" => {
            format!("https://kdexp.com/service/shipment/trace.do?barcode={tracking_number}")
        }
        _ => return None,
    };
    Some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_carrier() {
        let url = tracking_url("한진택배", "123456789").expect("known carrier");
        assert!(url.contains("123456789"));
        assert!(url.starts_with("https://www.hanjin.com/"));
    }

    #[test]
    fn test_unknown_carrier() {
        assert!(tracking_url("기타", "123").is_none());
        assert!(tracking_url("", "123").is_none());
    }

    #[test]
    fn test_empty_tracking_number() {
        assert!(tracking_url("한진택배", "").is_none());
    }
}
