use arrayvec::ArrayVec;

use crate::{
    conv, Api, CommandList as _, NativeResourceStates, Resource, TransitionBarrier,
    MAX_BARRIERS_PER_COPY,
};

/// Copies the whole of `source` into `destination`.
///
/// Each resource is transitioned only if its state is not already the copy
/// state, and both are returned to their incoming states afterwards. The
/// restoring batch is the staged batch with every barrier reversed, so no
/// other command may change the state of either resource in between.
pub(crate) unsafe fn copy_resource<A: Api>(
    list: &A::CommandList,
    destination: &Resource<A>,
    source: &Resource<A>,
) {
    if destination.raw == source.raw {
        log::trace!("Skipping copy of {:?} onto itself", source.raw);
        return;
    }

    let mut barriers = ArrayVec::<TransitionBarrier<A>, MAX_BARRIERS_PER_COPY>::new();

    let dst_before = conv::map_resource_state(destination.state);
    if dst_before != NativeResourceStates::COPY_DEST {
        barriers.push(TransitionBarrier {
            resource: &destination.raw,
            states: dst_before..NativeResourceStates::COPY_DEST,
        });
    }

    let src_before = conv::map_resource_state(source.state);
    if src_before != NativeResourceStates::COPY_SOURCE {
        barriers.push(TransitionBarrier {
            resource: &source.raw,
            states: src_before..NativeResourceStates::COPY_SOURCE,
        });
    }

    log::trace!(
        "Copying {:?} into {:?} with {} transition(s)",
        source.raw,
        destination.raw,
        barriers.len()
    );

    if !barriers.is_empty() {
        list.resource_barrier(&barriers);
    }

    list.copy_resource(&destination.raw, &source.raw);

    if !barriers.is_empty() {
        for barrier in barriers.iter_mut() {
            *barrier = barrier.reversed();
        }
        list.resource_barrier(&barriers);
    }
}
