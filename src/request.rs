//! Parse `Item:Qty,Item:Qty` request arguments

use crate::error::RequestError;
use crate::models::Request;

/// Example shown to users alongside parse errors
pub const USAGE_EXAMPLE: &str = "剛力の宝薬G2:9,魔匠の薬液:3";

const PAIR_SEPARATORS: [char; 3] = [',', '，', '、'];
const QUANTITY_SEPARATORS: [char; 2] = [':', '：'];

/// Parse a comma separated list of `Item:Quantity` pairs
///
/// Full-width separators are accepted. A repeated item keeps the last
/// quantity given; blank entries between separators are ignored.
pub fn parse_request(input: &str) -> Result<Request, RequestError> {
    let mut request = Request::new();

    for pair in input.split(PAIR_SEPARATORS).map(str::trim).filter(|p| !p.is_empty()) {
        let (item, quantity) = pair
            .rsplit_once(QUANTITY_SEPARATORS)
            .ok_or_else(|| RequestError::MissingSeparator(pair.to_string()))?;

        let item = item.trim();
        if item.is_empty() {
            return Err(RequestError::EmptyName(pair.to_string()));
        }

        let quantity = quantity.trim();
        let quantity: u64 = quantity.parse().map_err(|_| RequestError::InvalidQuantity {
            item: item.to_string(),
            quantity: quantity.to_string(),
        })?;

        request.insert(item.to_string(), quantity);
    }

    if request.is_empty() {
        return Err(RequestError::Empty);
    }
    Ok(request)
}
