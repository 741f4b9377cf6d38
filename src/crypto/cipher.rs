//! AES-128-CBC with PKCS#7 padding over whole buffers.

use aes::cipher::{BlockDecrypt, BlockEncrypt};
use aes::{Aes128, Block};
use zeroize::Zeroizing;

use super::{BLOCK_LEN, CryptoError, IV_LEN};

fn xor_blocks(block_a: &[u8], block_b: &[u8], output: &mut [u8; BLOCK_LEN]) {
    for ((out, a), b) in output.iter_mut().zip(block_a).zip(block_b) {
        *out = a ^ b;
    }
}

/// Encrypt `plaintext`, always appending 1..=16 bytes of padding.
pub fn encrypt(cipher: &Aes128, iv: &[u8; IV_LEN], plaintext: &[u8]) -> Vec<u8> {
    let pad = BLOCK_LEN - plaintext.len() % BLOCK_LEN;

    let mut padded = Zeroizing::new(Vec::with_capacity(plaintext.len() + pad));
    padded.extend_from_slice(plaintext);
    padded.resize(plaintext.len() + pad, pad as u8);

    let mut ciphertext = Vec::with_capacity(padded.len());
    let mut prev_block = *iv;
    let mut xor_output = Zeroizing::new([0u8; BLOCK_LEN]);

    for chunk in padded.chunks_exact(BLOCK_LEN) {
        xor_blocks(chunk, &prev_block, &mut xor_output);

        let mut aes_block = Block::from(*xor_output);
        cipher.encrypt_block(&mut aes_block);

        prev_block.copy_from_slice(aes_block.as_slice());
        ciphertext.extend_from_slice(&prev_block);
    }

    ciphertext
}

/// Decrypt `ciphertext` and strip its padding.
pub fn decrypt(
    cipher: &Aes128,
    iv: &[u8; IV_LEN],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(CryptoError::BlockLength(ciphertext.len()));
    }

    let mut plaintext = Zeroizing::new(Vec::with_capacity(ciphertext.len()));
    let mut prev_block: &[u8] = iv;
    let mut xor_output = Zeroizing::new([0u8; BLOCK_LEN]);

    for chunk in ciphertext.chunks_exact(BLOCK_LEN) {
        let mut aes_block = Block::clone_from_slice(chunk);
        cipher.decrypt_block(&mut aes_block);

        xor_blocks(aes_block.as_slice(), prev_block, &mut xor_output);
        plaintext.extend_from_slice(&*xor_output);

        prev_block = chunk;
    }

    let pad = usize::from(plaintext[plaintext.len() - 1]);
    if pad == 0 || pad > BLOCK_LEN {
        return Err(CryptoError::Padding);
    }

    let body_len = plaintext.len() - pad;
    if plaintext[body_len..].iter().any(|&b| usize::from(b) != pad) {
        return Err(CryptoError::Padding);
    }

    plaintext.truncate(body_len);
    Ok(plaintext)
}
