//! Materials.

use crate::common::*;
use crate::spectrum::Spectrum;
use bitflags::bitflags;

bitflags! {
    /// Scattering/emission components of a material. These flags direct how
    /// the BSDF mixture is assembled at shading time.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct MtlFlags: u32 {
        /// Diffuse reflection component.
        const DIFFUSE = 1 << 1;
        /// Specular reflection component. Together with `DIFFUSE` this
        /// produces a glossy lobe instead of a perfect mirror.
        const SPECULAR = 1 << 2;
        /// Area-light emission.
        const EMISSIVE = 1 << 10;
    }
}

/// Surface material description.
#[derive(Clone, Debug)]
pub struct Material {
    /// Identifying name, for diagnostics.
    pub name: String,

    /// Component flags.
    pub flags: MtlFlags,

    /// Diffuse reflectance.
    pub diffuse: Spectrum,

    /// Specular reflectance.
    pub specular: Spectrum,

    /// Phong-lobe exponent.
    pub shininess: Float,

    /// Emitted radiance; meaningful only when `EMISSIVE` is set.
    pub radiance: Spectrum,
}

impl Material {
    /// Creates a purely diffuse material.
    ///
    /// * `name`    - Identifying name.
    /// * `diffuse` - Diffuse reflectance.
    pub fn diffuse(name: &str, diffuse: Spectrum) -> Self {
        Self {
            name: name.to_string(),
            flags: MtlFlags::DIFFUSE,
            diffuse,
            specular: Spectrum::ZERO,
            shininess: 32.0,
            radiance: Spectrum::ZERO,
        }
    }

    /// Creates a perfect-mirror material.
    ///
    /// * `name`     - Identifying name.
    /// * `specular` - Specular reflectance.
    pub fn mirror(name: &str, specular: Spectrum) -> Self {
        Self {
            name: name.to_string(),
            flags: MtlFlags::SPECULAR,
            diffuse: Spectrum::ZERO,
            specular,
            shininess: 32.0,
            radiance: Spectrum::ZERO,
        }
    }

    /// Creates a glossy material combining a diffuse base with a Phong-style
    /// specular lobe.
    ///
    /// * `name`      - Identifying name.
    /// * `diffuse`   - Diffuse reflectance.
    /// * `specular`  - Specular reflectance.
    /// * `shininess` - Phong-lobe exponent.
    pub fn glossy(name: &str, diffuse: Spectrum, specular: Spectrum, shininess: Float) -> Self {
        Self {
            name: name.to_string(),
            flags: MtlFlags::DIFFUSE | MtlFlags::SPECULAR,
            diffuse,
            specular,
            shininess,
            radiance: Spectrum::ZERO,
        }
    }

    /// Creates an area-light material with the given emitted radiance.
    ///
    /// * `name`     - Identifying name.
    /// * `radiance` - Emitted radiance.
    pub fn emissive(name: &str, radiance: Spectrum) -> Self {
        Self {
            name: name.to_string(),
            flags: MtlFlags::DIFFUSE | MtlFlags::EMISSIVE,
            diffuse: Spectrum::ZERO,
            specular: Spectrum::ZERO,
            shininess: 32.0,
            radiance,
        }
    }

    /// Returns whether the material emits light.
    pub fn is_emissive(&self) -> bool {
        self.flags.contains(MtlFlags::EMISSIVE)
    }

    /// Returns the emitted radiance.
    pub fn emitted(&self) -> Spectrum {
        self.radiance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_composition() {
        let m = Material::glossy("m", Spectrum::splat(0.5), Spectrum::splat(0.3), 16.0);
        assert!(m.flags.contains(MtlFlags::DIFFUSE));
        assert!(m.flags.contains(MtlFlags::SPECULAR));
        assert!(!m.is_emissive());

        let light = Material::emissive("light", Spectrum::splat(10.0));
        assert!(light.is_emissive());
        assert_eq!(light.emitted(), Spectrum::splat(10.0));
    }
}
