use crate::core::profile::Fingerprint;
use crate::http::response::HttpResponse;

pub fn fingerprint_response(resp: &HttpResponse) -> Fingerprint {
    Fingerprint {
        server: resp.header("server").map(str::to_string),
        powered_by: resp.header("x-powered-by").map(str::to_string),
    }
}
