use actix_web::{http::header::HeaderName, HttpRequest};
use std::str::FromStr;

pub fn get_header<T>(req: &HttpRequest, header_name: &'static str) -> Result<Option<T>, String>
where
    T: FromStr,
{
    let Some(header_value) = req.headers().get(HeaderName::from_static(header_name)) else {
        return Ok(None);
    };

    let value = header_value
        .to_str()
        .map_err(|_| format!("header {header_name} can't be converted to string"))?
        .trim();

    if value.is_empty() {
        return Ok(None);
    }

    value
        .parse::<T>()
        .map_err(|_| format!("header {header_name} has wrong type"))
        .map(Some)
}
