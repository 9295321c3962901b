#![no_main]

use libfuzzer_sys::fuzz_target;
use sigma_zkp::protocol::SigmaRelation;
use sigma_zkp::variants::schnorr::SchnorrRelation;
use sigma_zkp::{GroupAlgebra, SchnorrGroup};

fuzz_target!(|data: &[u8]| {
    let relation = SchnorrRelation::new(SchnorrGroup::rfc5114());

    let parts: Vec<Vec<u8>> = data.chunks(256).map(|chunk| chunk.to_vec()).collect();
    let _ = relation.decode_commitment(&parts);
    let _ = relation.decode_response(&parts);
    let _ = relation.algebra().scalar_from_bytes(data);
});
