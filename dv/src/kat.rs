/*++

Licensed under the Apache-2.0 license.

File Name:

    kat.rs

Abstract:

    File contains the parser for known-answer-test files in the NIST LWC
    `LWC_AEAD_KAT_128_128.txt` format: blank-line separated records of
    `Count`, `Key`, `Nonce`, `PT`, `AD` and `CT` fields, where `CT` is the
    ciphertext with the tag appended.

--*/

use std::path::Path;

use ascon_emu_crypto::{KEY_SIZE, NONCE_SIZE, TAG_SIZE};

use crate::VerifyError;

/// One known-answer test vector
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct KatVector {
    pub count: u32,
    pub key: [u8; KEY_SIZE],
    pub nonce: [u8; NONCE_SIZE],
    pub ad: Vec<u8>,
    pub pt: Vec<u8>,

    /// Expected ciphertext, tag excluded
    pub ct: Vec<u8>,
    pub tag: [u8; TAG_SIZE],
}

#[derive(Default)]
struct Builder {
    count: Option<u32>,
    key: Option<Vec<u8>>,
    nonce: Option<Vec<u8>>,
    pt: Option<Vec<u8>>,
    ad: Option<Vec<u8>>,
    ct: Option<Vec<u8>>,
}

impl Builder {
    fn is_empty(&self) -> bool {
        self.count.is_none()
            && self.key.is_none()
            && self.nonce.is_none()
            && self.pt.is_none()
            && self.ad.is_none()
            && self.ct.is_none()
    }

    fn finish(self, line: usize) -> Result<KatVector, VerifyError> {
        let err = |msg: &str| VerifyError::Parse {
            line,
            msg: msg.into(),
        };
        let count = self.count.ok_or_else(|| err("record has no Count"))?;
        let key: [u8; KEY_SIZE] = self
            .key
            .ok_or_else(|| err("record has no Key"))?
            .try_into()
            .map_err(|_| err("Key is not 16 bytes"))?;
        let nonce: [u8; NONCE_SIZE] = self
            .nonce
            .ok_or_else(|| err("record has no Nonce"))?
            .try_into()
            .map_err(|_| err("Nonce is not 16 bytes"))?;
        let pt = self.pt.ok_or_else(|| err("record has no PT"))?;
        let ad = self.ad.ok_or_else(|| err("record has no AD"))?;
        let mut ct = self.ct.ok_or_else(|| err("record has no CT"))?;
        if ct.len() != pt.len() + TAG_SIZE {
            return Err(err("CT length is not PT length plus the tag"));
        }
        let tag: [u8; TAG_SIZE] = ct.split_off(pt.len()).try_into().unwrap();
        Ok(KatVector {
            count,
            key,
            nonce,
            ad,
            pt,
            ct,
            tag,
        })
    }
}

impl KatVector {
    /// Parse every record in a KAT file body
    pub fn parse(text: &str) -> Result<Vec<KatVector>, VerifyError> {
        let mut vectors = Vec::new();
        let mut builder = Builder::default();
        let mut last_line = 0;
        for (i, raw) in text.lines().enumerate() {
            let lineno = i + 1;
            let line = raw.trim();
            if line.is_empty() {
                if !builder.is_empty() {
                    vectors.push(std::mem::take(&mut builder).finish(lineno)?);
                }
                continue;
            }
            last_line = lineno;
            let (field, value) = line.split_once('=').ok_or_else(|| VerifyError::Parse {
                line: lineno,
                msg: format!("expected 'Field = value', got {line:?}"),
            })?;
            let value = value.trim();
            let hex_value = || {
                hex::decode(value).map_err(|e| VerifyError::Parse {
                    line: lineno,
                    msg: format!("bad hex value: {e}"),
                })
            };
            match field.trim() {
                "Count" => {
                    builder.count = Some(value.parse().map_err(|e| VerifyError::Parse {
                        line: lineno,
                        msg: format!("bad count: {e}"),
                    })?)
                }
                "Key" => builder.key = Some(hex_value()?),
                "Nonce" => builder.nonce = Some(hex_value()?),
                "PT" => builder.pt = Some(hex_value()?),
                "AD" => builder.ad = Some(hex_value()?),
                "CT" => builder.ct = Some(hex_value()?),
                other => {
                    return Err(VerifyError::Parse {
                        line: lineno,
                        msg: format!("unknown field {other:?}"),
                    })
                }
            }
        }
        if !builder.is_empty() {
            vectors.push(builder.finish(last_line)?);
        }
        Ok(vectors)
    }

    /// Load every record from a KAT file
    pub fn load(path: &Path) -> Result<Vec<KatVector>, VerifyError> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    /// Load records matching `filter`, keeping at most `sample_size` of them
    pub fn load_filtered(
        path: &Path,
        filter: impl Fn(&KatVector) -> bool,
        sample_size: Option<usize>,
    ) -> Result<Vec<KatVector>, VerifyError> {
        let mut vectors: Vec<KatVector> = Self::load(path)?.into_iter().filter(filter).collect();
        if let Some(n) = sample_size {
            vectors.truncate(n);
        }
        Ok(vectors)
    }
}
