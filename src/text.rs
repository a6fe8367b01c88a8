// AIDEV-NOTE: Text Normalizer (C1)
// Deterministically canonicalizes strings (case, diacritics, punctuation,
// whitespace) under four named profiles. Mirrors
// examples/original_source/py/domain/services/text_normalizer.py and the
// normalize_text() family in apiserver.py, generalized into named profiles.

use unicode_normalization::UnicodeNormalization;

/// Flags controlling one normalization pass. A named `Profile` is just a
/// fixed set of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
  pub keep_spaces: bool,
  pub keep_special_chars: bool,
  pub keep_case: bool,
  pub keep_diacritics: bool,
}

/// The four named normalization profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
  /// Single tokens: no spaces, no punctuation, no case, no diacritics.
  Word,
  /// A bare file name: keeps spaces and punctuation, drops case/diacritics.
  FileName,
  /// A directory path: same flags as FileName (kept distinct so callers
  /// can see intent at the call site).
  Path,
  /// A free-text search query: keeps spaces, drops punctuation/case/diacritics.
  SearchTerm,
}

impl Profile {
  pub fn options(self) -> NormalizeOptions {
    match self {
      Profile::Word => NormalizeOptions {
        keep_spaces: false,
        keep_special_chars: false,
        keep_case: false,
        keep_diacritics: false,
      },
      Profile::FileName => NormalizeOptions {
        keep_spaces: true,
        keep_special_chars: true,
        keep_case: false,
        keep_diacritics: false,
      },
      Profile::Path => NormalizeOptions {
        keep_spaces: true,
        keep_special_chars: true,
        keep_case: false,
        keep_diacritics: false,
      },
      Profile::SearchTerm => NormalizeOptions {
        keep_spaces: true,
        keep_special_chars: false,
        keep_case: false,
        keep_diacritics: false,
      },
    }
  }
}

/// Normalize `text` under a named profile.
pub fn normalize(text: &str, profile: Profile) -> String {
  normalize_with(text, profile.options())
}

/// Normalize `text` under explicit flags.
pub fn normalize_with(text: &str, opts: NormalizeOptions) -> String {
  let mut s = text.to_string();

  if !opts.keep_diacritics {
    s = fold_diacritics(&s);
  }

  if !opts.keep_case {
    s = s.to_lowercase();
  }

  if !opts.keep_special_chars {
    s = s
      .chars()
      .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
      .collect();
  }

  // Whitespace collapse: runs of whitespace -> single space, always.
  let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");

  let spaced = if opts.keep_spaces {
    collapsed
  } else {
    collapsed.split(' ').filter(|p| !p.is_empty()).collect::<Vec<_>>().join("_")
  };

  spaced.trim().to_string()
}

/// NFKC-normalize, then fold Latin-extended diacritics (including the
/// Turkish letters that NFKD cannot decompose) to plain ASCII. Characters
/// with no entry in the table are passed through unchanged, preserving
/// their original case — case folding is a separate pipeline stage.
fn fold_diacritics(text: &str) -> String {
  let nfkc: String = text.nfkc().collect();
  let mut out = String::with_capacity(nfkc.len());
  for c in nfkc.chars() {
    match fold_char(c) {
      Some(repl) => out.push_str(repl),
      None => out.push(c),
    }
  }
  out
}

fn fold_char(c: char) -> Option<&'static str> {
  Some(match c {
    // Turkish
    'ç' | 'Ç' => "c",
    'ğ' | 'Ğ' => "g",
    'ı' | 'İ' => "i",
    'ö' | 'Ö' => "o",
    'ş' | 'Ş' => "s",
    'ü' | 'Ü' => "u",
    // Latin-1 supplement / Latin Extended-A, grouped by target letter
    'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å'
    | 'Ā' | 'Ă' | 'Ą' => "a",
    'æ' | 'Æ' => "ae",
    'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' | 'Ć' | 'Ĉ' | 'Ċ' | 'Č' => "c",
    'ď' | 'đ' | 'Ď' | 'Đ' => "d",
    'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' | 'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ĕ'
    | 'Ė' | 'Ę' | 'Ě' => "e",
    'ĝ' | 'ğ' | 'ġ' | 'ģ' | 'Ĝ' | 'Ġ' | 'Ģ' => "g",
    'ĥ' | 'ħ' | 'Ĥ' | 'Ħ' => "h",
    'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'Ì' | 'Í' | 'Î' | 'Ï' | 'Ĩ' | 'Ī' | 'Ĭ'
    | 'Į' => "i",
    'ĵ' | 'Ĵ' => "j",
    'ķ' | 'Ķ' => "k",
    'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' | 'Ĺ' | 'Ļ' | 'Ľ' | 'Ŀ' | 'Ł' => "l",
    'ñ' | 'ń' | 'ņ' | 'ň' | 'Ñ' | 'Ń' | 'Ņ' | 'Ň' => "n",
    'ò' | 'ó' | 'ô' | 'õ' | 'ō' | 'ŏ' | 'ő' | 'ø' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ō' | 'Ŏ' | 'Ő'
    | 'Ø' => "o",
    'œ' | 'Œ' => "oe",
    'ŕ' | 'ŗ' | 'ř' | 'Ŕ' | 'Ŗ' | 'Ř' => "r",
    'ś' | 'ŝ' | 'ş' | 'š' | 'Ś' | 'Ŝ' | 'Š' => "s",
    'ß' => "ss",
    'ţ' | 'ť' | 'ŧ' | 'Ţ' | 'Ť' | 'Ŧ' => "t",
    'ù' | 'ú' | 'û' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' | 'Ù' | 'Ú' | 'Û' | 'Ũ' | 'Ū' | 'Ŭ'
    | 'Ů' | 'Ű' | 'Ų' => "u",
    'ŵ' | 'Ŵ' => "w",
    'ý' | 'ÿ' | 'ŷ' | 'Ý' | 'Ÿ' | 'Ŷ' => "y",
    'ź' | 'ż' | 'ž' | 'Ź' | 'Ż' | 'Ž' => "z",
    _ => return None,
  })
}
