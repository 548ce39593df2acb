//! Randomised round-trip coverage: synthetic tiles encoded into a region-
//! shaped buffer must decode back bit-exact through the tile payload path.

use tessera_protocol::{
    decode_tile, encode_pixels, scan_ready_tiles, RegionLayout, BYTES_PER_PIXEL,
};

struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        ((x.wrapping_mul(0x2545F4914F6CDD1D)) >> 32) as u32
    }

    fn gen_range(&mut self, max_exclusive: u32) -> u32 {
        if max_exclusive == 0 {
            return 0;
        }
        self.next_u32() % max_exclusive
    }

    fn next_f32(&mut self) -> f32 {
        // Mix in negatives and magnitudes well away from [0, 1].
        (self.next_u32() as f32 / u32::MAX as f32 - 0.5) * 2e6
    }
}

/// Build a full region image buffer, write every tile's payload where the
/// layout says it lives, then decode each tile and compare.
#[test]
fn every_tile_round_trips_losslessly() {
    let mut rng = Rng::new(0x1234_5678_9ABC_DEF0);

    // Mix of exact-multiple, ragged-width, ragged-height and tiny images.
    let cases = [
        (128u32, 128u32, 64u32),
        (100, 128, 64),
        (128, 100, 64),
        (100, 100, 64),
        (65, 33, 64),
        (1, 1, 64),
        (17, 90, 16),
    ];

    for (width, height, tile_size) in cases {
        let layout = RegionLayout::compute(width, height, tile_size).unwrap();
        let mut region = vec![0u8; layout.total_bytes];
        let mut expected = Vec::with_capacity(layout.tile_count());

        for index in 0..layout.tile_count() {
            let geom = layout.tile_geometry(index).unwrap();
            let pixels: Vec<[f32; 4]> = (0..geom.width * geom.height)
                .map(|_| {
                    [
                        rng.next_f32(),
                        rng.next_f32(),
                        rng.next_f32(),
                        rng.next_f32(),
                    ]
                })
                .collect();

            let (offset, len) = layout.tile_payload(&geom).unwrap();
            let bytes = encode_pixels(&pixels);
            assert_eq!(bytes.len(), len);
            region[offset..offset + len].copy_from_slice(&bytes);
            region[index] = 1;
            expected.push(pixels);
        }

        let ready = scan_ready_tiles(&region[..layout.header_bytes]);
        assert_eq!(ready, (0..layout.tile_count()).collect::<Vec<_>>());

        for index in ready {
            let geom = layout.tile_geometry(index).unwrap();
            let (offset, len) = layout.tile_payload(&geom).unwrap();
            let rect = decode_tile(&region[offset..offset + len], &geom).unwrap();
            assert_eq!(rect.pixels, expected[index], "tile {index} of {width}x{height}");
            assert_eq!(rect.width, geom.width);
            assert_eq!(rect.height, geom.height);
        }
    }
}

/// Tile payloads must never run past their slot reservation or into a
/// neighbouring slot, whatever the cropping.
#[test]
fn payloads_stay_inside_their_slots() {
    let mut rng = Rng::new(0xDEAD_BEEF_0BAD_F00D);
    for _ in 0..200 {
        let width = 1 + rng.gen_range(300);
        let height = 1 + rng.gen_range(300);
        let tile_size = 1 + rng.gen_range(96);

        let layout = RegionLayout::compute(width, height, tile_size).unwrap();
        for index in 0..layout.tile_count() {
            let geom = layout.tile_geometry(index).unwrap();
            let slot = layout.tile_data_offset(index).unwrap();
            let (offset, len) = layout.tile_payload(&geom).unwrap();

            assert!(offset >= slot);
            assert!(offset + len <= slot + layout.tile_bytes);
            assert_eq!(
                len,
                geom.width as usize * geom.height as usize * BYTES_PER_PIXEL
            );
            // The crop plus the visible rows always account for a full tile.
            assert_eq!(geom.cropped_rows + geom.height, layout.tile_size);
        }
    }
}
