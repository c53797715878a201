//! Result values reported by the UI process.

/// Response code of a portal request, as defined by the XDG portal backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Response {
    /// The user accepted the dialog.
    Accepted = 0,
    /// The user dismissed the dialog.
    Cancelled = 1,
    /// The interaction ended some other way.
    Other = 2,
}

impl From<u32> for Response {
    fn from(code: u32) -> Self {
        match code {
            0 => Response::Accepted,
            1 => Response::Cancelled,
            _ => Response::Other,
        }
    }
}

impl From<Response> for u32 {
    fn from(response: Response) -> Self {
        response as u32
    }
}

/// A completion notification for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion<P> {
    pub response: Response,
    pub payload: P,
}

impl<P> Completion<P> {
    pub fn new(response: Response, payload: P) -> Self {
        Self { response, payload }
    }
}
