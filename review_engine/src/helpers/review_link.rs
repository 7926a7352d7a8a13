use log::warn;
use url::Url;

/// The marketplace's review-submission page.
const REVIEW_ENDPOINT: &str = "https://marketplace.example/shop/review/productreview";

/// Returned instead of a link when the product or order code is missing. The message still goes out; the
/// customer just gets no deep link.
pub const REVIEW_LINK_PLACEHOLDER: &str = "https://marketplace.example/shop/reviews";

pub const DEFAULT_RATING: u8 = 5;

/// Derives the short order code from the marketplace order id: the substring before the first hyphen, or the
/// whole id when there is none.
pub fn order_code_from_id(order_id: &str) -> &str {
    order_id.split('-').next().unwrap_or(order_id)
}

/// Builds the review URL for a product/order pair. Pure function: the codes are percent-encoded as query
/// parameters, the rating is clamped to `[1, 5]`. Missing codes yield [`REVIEW_LINK_PLACEHOLDER`] rather
/// than an error.
pub fn review_link(product_code: &str, order_code: &str, rating: u8) -> String {
    if product_code.is_empty() || order_code.is_empty() {
        warn!("Cannot build review link without both codes (product: '{product_code}', order: '{order_code}')");
        return REVIEW_LINK_PLACEHOLDER.to_string();
    }
    let rating = rating.clamp(1, DEFAULT_RATING);
    let params =
        [("productCode", product_code), ("orderCode", order_code), ("rating", &rating.to_string())];
    match Url::parse_with_params(REVIEW_ENDPOINT, &params) {
        Ok(url) => url.to_string(),
        Err(e) => {
            // The endpoint is a compile-time constant, so this is unreachable in practice.
            warn!("Could not build review link: {e}");
            REVIEW_LINK_PLACEHOLDER.to_string()
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builds_an_encoded_link() {
        let link = review_link("P 100/2", "409123456", 5);
        assert_eq!(
            link,
            "https://marketplace.example/shop/review/productreview?productCode=P+100%2F2&orderCode=409123456&rating=5"
        );
    }

    #[test]
    fn rating_is_clamped() {
        assert!(review_link("P1", "O1", 0).ends_with("rating=1"));
        assert!(review_link("P1", "O1", 9).ends_with("rating=5"));
    }

    #[test]
    fn missing_codes_yield_placeholder() {
        assert_eq!(review_link("", "409123456", 5), REVIEW_LINK_PLACEHOLDER);
        assert_eq!(review_link("P1", "", 5), REVIEW_LINK_PLACEHOLDER);
    }

    #[test]
    fn order_code_derivation() {
        assert_eq!(order_code_from_id("409123456-A1"), "409123456");
        assert_eq!(order_code_from_id("409123456"), "409123456");
        assert_eq!(order_code_from_id(""), "");
    }
}
