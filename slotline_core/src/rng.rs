use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::{Digest, Sha256};

// Provably-fair entropy:
// server_seed (secret) + client_seed + nonce -> HMAC-SHA256 -> bytes -> floats in [0,1)

pub type HmacSha256 = Hmac<Sha256>;

/// A source of uniform values in `[0, 1)`.
///
/// Every spin takes its own source; nothing is shared between spins.
pub trait EntropySource {
    fn next_unit(&mut self) -> f64;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick(&mut self, len: usize) -> usize {
        let u = self.next_unit();
        ((u * len as f64).floor() as usize).min(len - 1)
    }
}

impl<E: EntropySource + ?Sized> EntropySource for &mut E {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

pub fn derive_hash_hex(input: &[u8]) -> String {
    hex::encode(Sha256::digest(input))
}

/// Fresh 32-byte server seed, hex encoded.
pub fn random_seed_hex() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

fn chunk_to_unit(chunk: &[u8]) -> f64 {
    let v = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    (v as f64) / (u32::MAX as f64 + 1.0)
}

pub fn derive_floats(hmac_bytes: &[u8], count: usize) -> Vec<f64> {
    let mut stream = FairEntropy::from_bytes(hmac_bytes.to_vec());
    (0..count).map(|_| stream.next_unit()).collect()
}

pub struct ProvablyFairRng {
    pub server_seed: String, // secret
    pub client_seed: String,
    pub nonce: u64,
}

impl ProvablyFairRng {
    pub fn new(server_seed: impl Into<String>, client_seed: impl Into<String>, nonce: u64) -> Self {
        Self {
            server_seed: server_seed.into(),
            client_seed: client_seed.into(),
            nonce,
        }
    }

    pub fn server_seed_hash_hex(&self) -> String {
        derive_hash_hex(self.server_seed.as_bytes())
    }

    pub fn hmac_bytes(&self) -> [u8; 32] {
        let mut mac =
            HmacSha256::new_from_slice(self.server_seed.as_bytes()).expect("HMAC accepts any key length");
        let msg = format!("{}:{}", self.client_seed, self.nonce);
        mac.update(msg.as_bytes());
        let res = mac.finalize().into_bytes();
        let mut out = [0u8; 32];
        out.copy_from_slice(&res);
        out
    }

    pub fn next_floats(&self, count: usize) -> Vec<f64> {
        derive_floats(&self.hmac_bytes(), count)
    }

    /// Entropy stream for one spin.
    pub fn stream(&self) -> FairEntropy {
        FairEntropy::from_bytes(self.hmac_bytes().to_vec())
    }
}

/// Stream over the HMAC bytes in 4-byte big-endian chunks. When the buffer
/// runs out it is replaced by the SHA-256 of itself.
#[derive(Debug, Clone)]
pub struct FairEntropy {
    buffer: Vec<u8>,
    offset: usize,
}

impl FairEntropy {
    fn from_bytes(buffer: Vec<u8>) -> Self {
        Self { buffer, offset: 0 }
    }
}

impl EntropySource for FairEntropy {
    fn next_unit(&mut self) -> f64 {
        if self.offset + 4 > self.buffer.len() {
            self.buffer = Sha256::digest(&self.buffer).to_vec();
            self.offset = 0;
        }
        let f = chunk_to_unit(&self.buffer[self.offset..self.offset + 4]);
        self.offset += 4;
        f
    }
}

/// Operating-system backed entropy for unverified play.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadEntropy;

impl EntropySource for ThreadEntropy {
    fn next_unit(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Replays a fixed list of values, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct FixedSequence {
    values: Vec<f64>,
    next: usize,
}

impl FixedSequence {
    /// Values are clamped into `[0, 1)`. An empty list yields zeros.
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        Self { values, next: 0 }
    }

    /// Sequence that picks exactly `indices` out of a set of `len` symbols.
    pub fn picking(indices: &[usize], len: usize) -> Self {
        Self::new(indices.iter().map(|&i| (i as f64 + 0.5) / len as f64))
    }
}

impl EntropySource for FixedSequence {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.next % self.values.len()];
        self.next += 1;
        v
    }
}
