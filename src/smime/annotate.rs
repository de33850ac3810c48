//! Presentation annotator: adds the S/MIME trust row to the header output.

use crate::model::header_output::{HeaderDisplay, HeaderOutput};
use crate::model::verification::{Verdict, VerificationState};

/// Key of the injected header row.
pub const SMIME_HEADER_KEY: &str = "smime";

/// Title of the injected header row.
pub const SMIME_HEADER_TITLE: &str = "S/Mime";

/// 16x16 PNG shown for a verified signature (base64).
pub const ICON_VALID: &str = "iVBORw0KGgoAAAANSUhEUgAAABAAAAAQCAYAAAAf8/9hAAACP0lEQVQ4T6WTW0hTcRzHv1ttc56zKTYSnEY4IiiDXkZFO10YFElqPcwIL09JBdVAWWgPuR7CGgiroKgHoYcQXGDUS3cqNB9ybBGLYmE7WjLZ5XTc1XPZaR5hbGjR6Pf2v3w+f378vn8F/rMU5fLOMVtNAGA97R5xmS1LMPjAdq5Crb3FCVlIvGR1dnte/7Pg0v1WO6HRu5vNHWDTMbzyj4MX+CMFgc25Xe1xBri1Wuq712wnNaS7ZU8nFtMhaFQkOF6FZ9NjKy2cv2m9rFq3/govCoPhePhasejCDaudqNS5W/d2IZYIYolPyW8kUhz8QR8UZ1yW/toa41AL1QXvl3fwfZ18LCF35+7FqaenXRY7qdW52/Z1Y4H9jCyXlOEoE0OQ/g5BkChFz9XdUvvhHsxF/TAatiGTEfD8/UNkl5IDJFE91HawGz+iH5HhEjIcYxjM0LOQBJEacXonFCcHdvRXVemGGhvroVQqYdA3oH5DEyZ9L2BuohCKeJFeWpThOMOCpn8ix4vU6PXARGGMx/u2uPQk4dhsqpMlFWoSW+t34dv8NFJZVoZ/MQnM0WGIEk+ND8/IcEkOjp7d5CL1WkeDqVaWFBfLJDFPRyDlJOrJ7dkCvCpIh05tdBE6wmFsNEChXJlwgkkhTMchiAL1ciRSAq+ZxP2d1cOkvrK3zlSDJJvFQojJ95yj3owyq+A1BcublhO6YQ2h7uUyfH5UuQNTnuTbkp6KFn+MsvmYaueHR/yn/F3505Qt+BtUfPYbUlHqzfAnX9IAAAAASUVORK5CYII=";

/// 16x16 PNG shown for a signature that did not verify (base64).
pub const ICON_INVALID: &str = "iVBORw0KGgoAAAANSUhEUgAAABAAAAAQCAYAAAAf8/9hAAACnUlEQVQ4T22TyU8TYRjGn2mBIpTuFdtQDQgqAnHBuBBSJCRC0Gg0HjSe9OKSaUo86V+gF03rTMST4WJUNBoSgks8KIukRGPdoKISFYVClxkLJSw64zczzLDId5r5nvf5vdsMhWXnsdNQ3BCb+bL8XnpfSaPUwFZAb3TmXslxrfZPjY4HG2PppsWQDmduYCVNA7Q7jNc99d6zRYfrMNDyELHQm+D+eUi7M4dx1eyhNxxrxOCdDow+DzUfiE+ekxLIgDankfHUVdNFtZsxGwkhq9yLyIMujPWFg0TWu7276JL6SswO9MBQVo3BR68w0hliD8UmfVQr6dmc7/5ceeYgZvtfKlXrdDBU1CDS1gN9ViYk88yHbkAUZNlQ4UXftXuYiMbWyRXcJxXYC0x00bZ8UGpTBJK9tRYQ/mL6badmFkXg6+sxJEdS7FGpAnVQt50mxuEy0oUV9iUQEIOaWTa/iyMZTbPHYymfNgMVcstuYmxrcujCTdYFyLwomYf6OXDjU+yJhGL+D9BCAK6y9bTbnCbTVfpVj0hufiZXIRr5FjyZSGkr1lq4aTUx7h1b6JKqUqR6n2lla5l0euRV7cOnF2FEwx+Dp5IKRAbcsFkCBdvL/Rt3l4LvfkIGp2SXypaD5tNQBGKubkCk5z1Gwv3saY73UYzZXGhyWod2HqkF37XITIzfo3PQEbcnP0PJJMEIxLq3Eb13n+I3N66skSEV2I16f4GDkgOlxMNxAckJgZV0W56O9jh0GmQ4ISCRElifVIHaY8BqYWy5JNAiYpinkEwLbBMJkHRZMyraLx6IT6K5ieMWPmUVctViCRgyKP/MHzF4nueX/ExEY7IzKXp6TmSJtvIaJdBlq3XtBY77oe1v0cMlk6n4Yiq15Ff/ByGcCctPbC34AAAAAElFTkSuQmCC";

/// Add the trust indicator for `state` to `output`.
///
/// Unsigned messages get the mapping back untouched. Signed ones get exactly
/// one row under [`SMIME_HEADER_KEY`], replacing any existing row there.
pub fn annotate(state: VerificationState, mut output: HeaderOutput) -> HeaderOutput {
    let Some(verdict) = state.verdict() else {
        return output;
    };

    output.insert(SMIME_HEADER_KEY.to_string(), indicator(verdict));
    output
}

/// The header row for a verdict.
pub fn indicator(verdict: Verdict) -> HeaderDisplay {
    let (icon, alt) = match verdict {
        Verdict::Valid => (ICON_VALID, "validated"),
        Verdict::Invalid => (ICON_INVALID, "invalid"),
    };
    HeaderDisplay {
        title: SMIME_HEADER_TITLE.to_string(),
        value: format!(r#"<img src="data:image/png;base64,{icon}" alt="{alt}" />"#),
        html: true,
    }
}
