//! Scene stream ingestion: parsed multibody descriptors → joint table.
//!
//! The generalized state vectors of a multibody open with the floating
//! base: 7 position scalars (3 translation + 4 quaternion) and 6 velocity
//! scalars (twist). Link coordinates follow in description order, so each
//! link's offsets fall out of two running cursors seeded at 7 and 6.

use simbus_common::scene::{JointFlags, JointInfo, SceneDescriptor};

/// Generalized position offset of the first link coordinate (floating
/// base pose occupies 7 scalars).
const BASE_POSITION_SCALARS: i32 = 7;

/// Generalized velocity offset of the first link DOF (floating base twist
/// occupies 6 scalars).
const BASE_VELOCITY_SCALARS: i32 = 6;

/// Append one joint record per link of `descriptor` to `table`.
///
/// A link with no position variable (or no DOF) gets `-1` for the
/// corresponding index, but the cursors always advance by the link's true
/// counts so later links stay addressed correctly. Records accumulate;
/// the table is only cleared by a simulation reset.
pub fn append_joint_records(table: &mut Vec<JointInfo>, descriptor: &SceneDescriptor) {
    let mut q_offset = BASE_POSITION_SCALARS;
    let mut u_offset = BASE_VELOCITY_SCALARS;

    for (index, link) in descriptor.links.iter().enumerate() {
        let mut flags = JointFlags::empty();
        if link.joint_type.is_motorized() {
            flags |= JointFlags::MOTORIZED;
        }

        table.push(JointInfo {
            joint_index: index as i32,
            q_index: if link.position_var_count > 0 { q_offset } else { -1 },
            u_index: if link.dof_count > 0 { u_offset } else { -1 },
            link_name: link.link_name.clone(),
            joint_name: link.joint_name.clone(),
            joint_type: link.joint_type,
            flags,
        });

        q_offset += link.position_var_count as i32;
        u_offset += link.dof_count as i32;
    }
}
